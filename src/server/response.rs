use crate::dispatcher::HeaderVec;
use crate::error::HttpError;
use may_minihttp::Response;
use serde_json::Value;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        415 => "Unsupported Media Type",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write a handler response: status, accumulated headers, then the body.
///
/// String bodies (including the empty-body sentinel) are written as plain
/// text; everything else is serialized as JSON with the configured default
/// content type. An explicit `Content-Type` in the header set wins.
pub fn write_handler_response(
    res: &mut Response,
    status: u16,
    body: &Value,
    headers: &HeaderVec,
    default_json_content_type: &str,
) {
    res.status_code(status as usize, status_reason(status));

    let mut content_type_set = false;
    for (name, value) in headers {
        if name.eq_ignore_ascii_case("content-type") {
            content_type_set = true;
        }
        let header = format!("{name}: {value}").into_boxed_str();
        res.header(Box::leak(header));
    }

    match body {
        Value::String(s) => {
            if !content_type_set {
                res.header("Content-Type: text/plain");
            }
            res.body_vec(s.clone().into_bytes());
        }
        other => {
            if !content_type_set {
                let header =
                    format!("Content-Type: {default_json_content_type}").into_boxed_str();
                res.header(Box::leak(header));
            }
            res.body_vec(serde_json::to_vec(other).unwrap_or_default());
        }
    }
}

/// Write the structured JSON body for a classified error.
pub fn write_error_response(res: &mut Response, err: &HttpError) {
    res.status_code(err.status() as usize, status_reason(err.status()));
    res.header("Content-Type: application/json");
    res.body_vec(err.to_body().to_string().into_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(415), "Unsupported Media Type");
    }
}
