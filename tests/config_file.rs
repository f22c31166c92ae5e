//! Loading stage options from TOML.

use codec_transform::test_utils::init_test_logging;
use codec_transform::{
    test_complete, test_phase, Codec, CodecError, CodecTransform, ConfigError, Emitter,
    FaultPolicy, Message, Step, TransformOptions,
};

fn init_test(name: &str) {
    init_test_logging();
    test_phase!(name);
}

struct Text;

impl Codec for Text {
    type Meta = String;

    fn expand(
        &mut self,
        meta: String,
        mut msg: Message<String>,
        _out: &mut Emitter<'_, String>,
    ) -> Result<Step<String>, CodecError> {
        msg.put(meta.as_bytes())?;
        Ok(Step::Emit(msg))
    }
}

#[test]
fn default_is_read_from_the_named_key() {
    init_test("default_is_read_from_the_named_key");
    let options = TransformOptions::<String>::from_toml_str(
        r#"
        object_mode = true
        meta = "s"
        s = "hELLO WORLD?"
        "#,
    )
    .unwrap();
    assert_eq!(options.meta_name(), Some("s"));

    let mut stage = CodecTransform::new(Text, options).unwrap();
    assert_eq!(stage.default_meta().map(String::as_str), Some("hELLO WORLD?"));
    assert_eq!(stage.fault_policy(), FaultPolicy::Ignore);

    stage.write(Message::new(Vec::new())).unwrap();
    let msg = stage.read().expect("expanded with the default");
    assert_eq!(msg.data, b"hELLO WORLD?");
    test_complete!("default_is_read_from_the_named_key");
}

#[test]
fn fault_policy_is_parsed() {
    init_test("fault_policy_is_parsed");
    let options = TransformOptions::<String>::from_toml_str(r#"fault_policy = "fail""#).unwrap();
    let stage = CodecTransform::new(Text, options).unwrap();
    assert_eq!(stage.fault_policy(), FaultPolicy::Fail);

    let err = TransformOptions::<String>::from_toml_str(r#"fault_policy = "retry""#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    test_complete!("fault_policy_is_parsed");
}

#[test]
fn byte_stream_mode_fails_at_construction() {
    init_test("byte_stream_mode_fails_at_construction");
    let options = TransformOptions::<String>::from_toml_str("object_mode = false").unwrap();
    let err = CodecTransform::new(Text, options).unwrap_err();
    assert!(matches!(err, ConfigError::ByteStreamMode));
    test_complete!("byte_stream_mode_fails_at_construction");
}

#[test]
fn non_string_meta_fails_at_construction() {
    init_test("non_string_meta_fails_at_construction");
    let options = TransformOptions::<String>::from_toml_str("meta = 7").unwrap();
    assert_eq!(options.meta_name(), None);
    let err = CodecTransform::new(Text, options).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidMetaProperty { found: "integer" }
    ));
    test_complete!("non_string_meta_fails_at_construction");
}

#[test]
fn mistyped_default_is_rejected() {
    init_test("mistyped_default_is_rejected");
    let err = TransformOptions::<String>::from_toml_str(
        r#"
        meta = "s"
        s = 42
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDefault { ref key, .. } if key == "s"));
    test_complete!("mistyped_default_is_rejected");
}

#[test]
fn non_bool_object_mode_is_ignored() {
    init_test("non_bool_object_mode_is_ignored");
    let options = TransformOptions::<String>::from_toml_str(r#"object_mode = "no""#).unwrap();
    assert!(options.validate().is_ok());
    test_complete!("non_bool_object_mode_is_ignored");
}

#[test]
fn malformed_document_is_a_parse_error() {
    init_test("malformed_document_is_a_parse_error");
    let err = TransformOptions::<String>::from_toml_str("meta = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("failed to parse transform configuration"));
    test_complete!("malformed_document_is_a_parse_error");
}

#[test]
fn missing_file_is_an_io_error() {
    init_test("missing_file_is_an_io_error");
    let err = TransformOptions::<String>::from_toml_file("does/not/exist.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
    test_complete!("missing_file_is_an_io_error");
}
