use qrscan_types::ResultKind;
use url::Url;

/// Link if `text` parses as an absolute URL, plain text otherwise
pub fn classify(text: &str) -> ResultKind {
    match Url::parse(text) {
        Ok(_) => ResultKind::Link,
        Err(_) => ResultKind::Text,
    }
}
