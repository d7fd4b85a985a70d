use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FracanimError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        FracanimError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        FracanimError::worker("x")
            .to_string()
            .contains("worker error:")
    );
    assert!(
        FracanimError::directory("out/frames", std::io::Error::other("denied"))
            .to_string()
            .contains("output directory error: 'out/frames'")
    );
}

#[test]
fn directory_keeps_io_source() {
    let err = FracanimError::directory("x", std::io::Error::other("denied"));
    let source = std::error::Error::source(&err).expect("io source");
    assert!(source.to_string().contains("denied"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FracanimError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
