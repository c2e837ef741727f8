use shortlist_core::config::EmbeddingSettings;
use shortlist_core::error::Error;
use shortlist_embed::{get_default_embedder, FakeEmbedder};
use shortlist_core::traits::Embedder;

fn fake_settings() -> EmbeddingSettings {
    EmbeddingSettings { fake: true, fake_dim: 384, ..EmbeddingSettings::default() }
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Fake embedder avoids loading model files
    let embedder = get_default_embedder(&fake_settings()).expect("embedder");
    let v1 = embedder.encode("hello world").expect("encode");
    let v2 = embedder.encode("hello world").expect("encode");

    assert_eq!(v1.dim(), 384, "embedding dim follows fake_dim");
    assert_eq!(embedder.dim(), 384);

    let norm: f32 = v1.as_slice().iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.as_slice().iter().zip(v2.as_slice()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn related_texts_score_higher_than_unrelated() {
    let embedder = FakeEmbedder::new(256);
    let q = embedder.encode("java developer").unwrap();
    let near = embedder.encode("Java developer assessment").unwrap();
    let far = embedder.encode("personality questionnaire").unwrap();
    assert!(q.dot(near.as_slice()) > q.dot(far.as_slice()));
}

#[test]
fn empty_input_is_an_encoding_error() {
    let embedder = FakeEmbedder::new(16);
    assert!(matches!(embedder.encode(""), Err(Error::Encoding(_))));
    assert!(matches!(embedder.encode("   \t"), Err(Error::Encoding(_))));
}
