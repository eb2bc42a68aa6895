use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use log::warn;
use reqwest::header::HeaderMap;

/// Whether a response body is JSON (login submit) or HTML (everything else).
/// Only affects the debug artifact's file extension.
#[derive(Debug, Clone, Copy)]
pub enum BodyKind {
    Html,
    Json,
}

impl BodyKind {
    fn extension(self) -> &'static str {
        match self {
            BodyKind::Html => "html",
            BodyKind::Json => "json",
        }
    }
}

/// Writes raw request/response captures for forensic inspection: erroring
/// exchanges always (when `on_error` is set), every exchange under `all`.
/// Failures to write are logged and otherwise ignored; the sink has no
/// effect on control flow.
#[derive(Debug, Clone)]
pub struct DebugSink {
    on_error: bool,
    all: bool,
    dir: PathBuf,
}

impl DebugSink {
    pub fn new(on_error: bool, all: bool) -> Self {
        Self {
            on_error,
            all,
            dir: PathBuf::from("debug"),
        }
    }

    pub fn should_dump(&self, exchange_errored: bool) -> bool {
        self.all || (self.on_error && exchange_errored)
    }

    pub fn dump(
        &self,
        url_path: &str,
        request_headers: &HeaderMap,
        response_headers: &HeaderMap,
        body: &str,
        kind: BodyKind,
    ) {
        if let Err(e) = self.try_dump(url_path, request_headers, response_headers, body, kind) {
            warn!("failed writing debug artifacts for {url_path}: {e}");
        }
    }

    fn try_dump(
        &self,
        url_path: &str,
        request_headers: &HeaderMap,
        response_headers: &HeaderMap,
        body: &str,
        kind: BodyKind,
    ) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let stamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
        let stem = format!("{stamp}_{}", url_path.replace('/', ""));

        fs::write(
            self.dir.join(format!("{stem}_req_headers.json")),
            headers_to_json(request_headers),
        )?;
        fs::write(
            self.dir.join(format!("{stem}_res_headers.json")),
            headers_to_json(response_headers),
        )?;
        fs::write(
            self.dir.join(format!("{stem}.{}", kind.extension())),
            body,
        )?;
        Ok(())
    }
}

fn headers_to_json(headers: &HeaderMap) -> String {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(name, value)| {
            let rendered = value.to_str().unwrap_or("<non-utf8>").to_string();
            (name.to_string(), serde_json::Value::String(rendered))
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::Value::Object(map))
        .unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_every_exchange_when_all_is_set() {
        let sink = DebugSink::new(false, true);
        assert!(sink.should_dump(false));
        assert!(sink.should_dump(true));
    }

    #[test]
    fn dumps_only_errors_by_default() {
        let sink = DebugSink::new(true, false);
        assert!(!sink.should_dump(false));
        assert!(sink.should_dump(true));
    }

    #[test]
    fn renders_headers_as_a_json_object() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "PHPSESSID=abc".parse().unwrap());
        let json = headers_to_json(&headers);
        assert!(json.contains("\"cookie\""));
        assert!(json.contains("PHPSESSID=abc"));
    }
}
