use super::*;

#[test]
fn plain_codec_is_identity() {
    let body = r#"{"refresh_token":"r1"}"#;
    assert_eq!(PlainCodec.encode(body).unwrap(), body);
    assert_eq!(PlainCodec.decode(body).unwrap(), body);
}

#[test]
fn plain_codec_keeps_empty_body() {
    assert_eq!(PlainCodec.encode("").unwrap(), "");
}
