//! Request/response envelope between a hosting shell and the extractor.

use serde::{Deserialize, Serialize};

use crate::CitationRecord;

/// A request from the hosting shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetCitationData,
}

/// Reply carrying the extracted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: CitationRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape() {
        let req: Request = serde_json::from_str(r#"{"action":"getCitationData"}"#).unwrap();
        assert_eq!(req, Request::GetCitationData);
        assert_eq!(
            serde_json::to_string(&Request::GetCitationData).unwrap(),
            r#"{"action":"getCitationData"}"#
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"action":"deleteEverything"}"#).is_err());
    }

    #[test]
    fn response_wraps_record_in_data() {
        let resp = Response {
            data: CitationRecord::minimal("T", "https://example.org"),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["data"]["title"], "T");
        assert_eq!(json["data"]["url"], "https://example.org");
    }
}
