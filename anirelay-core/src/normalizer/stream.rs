//! Episode stream normalization

use anirelay_common::{StreamResponse, StreamServer};
use serde_json::Value;

use super::fields::{absolutize, first_text, is_http_url, is_ok_response, text, FieldPath};

/// Keys under `data` holding the flat server array, probed in order
const SERVER_LISTS: &[&str] = &["mirror_list", "server_list", "stream_list", "url_list"];

const DEFAULT_RESOLUTION: &str = "Standard";
const DEFAULT_LABEL: &str = "Server";

mod keys {
    use super::FieldPath;

    pub const TITLE: &[FieldPath] = &[&["title"], &["episode"]];
    pub const RESOLUTION: &[FieldPath] = &[&["quality"], &["resolution"]];
    pub const LABEL: &[FieldPath] = &[&["server"], &["driver"], &["host"], &["name"], &["title"]];
    pub const URL: &[FieldPath] = &[&["url"], &["stream_url"], &["link"], &["href"]];
    /// Observed spellings of the server identifier
    pub const SERVER_ID: &[FieldPath] = &[
        &["serverId"],
        &["id"],
        &["mirrorId"],
        &["hash"],
        &["server_id"],
        &["_id"],
        &["linkId"],
    ];
}

/// Normalize an episode payload into its stream servers
///
/// The title defaults to `episode_id` when the upstream omits it.
pub fn normalize_stream(json: &Value, episode_id: &str) -> Option<StreamResponse> {
    if !is_ok_response(json) {
        return None;
    }
    let data = json.get("data").filter(|d| d.is_object())?;

    let title = first_text(data, keys::TITLE).unwrap_or_else(|| episode_id.to_string());

    Some(StreamResponse {
        title,
        servers: servers(data),
    })
}

/// Flat server arrays first, then the nested `server.qualities[].serverList[]` shape
fn servers(data: &Value) -> Vec<StreamServer> {
    if let Some(raw) = SERVER_LISTS
        .iter()
        .find_map(|key| data.get(*key).and_then(Value::as_array))
    {
        return raw.iter().filter_map(|item| stream_server(item, None)).collect();
    }

    data.get("server")
        .and_then(|server| server.get("qualities"))
        .and_then(Value::as_array)
        .map(|qualities| {
            qualities
                .iter()
                .flat_map(|quality| {
                    let resolution = quality.get("title").and_then(text);
                    quality
                        .get("serverList")
                        .and_then(Value::as_array)
                        .into_iter()
                        .flatten()
                        .filter_map(move |item| stream_server(item, resolution.as_deref()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Map one raw server entry
///
/// Kept only with a server id or an absolute http(s) URL.
pub fn stream_server(item: &Value, resolution_hint: Option<&str>) -> Option<StreamServer> {
    let direct_url = first_text(item, keys::URL)
        .map(|url| absolutize(&url))
        .filter(|url| is_http_url(url));
    let server_id = first_text(item, keys::SERVER_ID);

    let resolution = first_text(item, keys::RESOLUTION)
        .or_else(|| resolution_hint.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_RESOLUTION.to_string());
    let label = first_text(item, keys::LABEL).unwrap_or_else(|| DEFAULT_LABEL.to_string());

    StreamServer::new(label, resolution, direct_url, server_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mirror_list() {
        let json = json!({
            "statusCode": 200,
            "data": {
                "title": "Frieren Episode 1",
                "mirror_list": [
                    {
                        "quality": "720p",
                        "driver": "Pixeldrain",
                        "url": "https://pd.example/a.mp4"
                    },
                    { "resolution": "480p", "host": "Mega", "mirrorId": "m-480" },
                    { "quality": "360p", "server": "Broken", "url": "javascript:void(0)" },
                    { "server": "Relative", "url": "/otakudesu/server/abc" }
                ]
            }
        });

        let stream = normalize_stream(&json, "frieren-episode-1").unwrap();

        assert_eq!(stream.title, "Frieren Episode 1");
        assert_eq!(
            stream.servers,
            vec![
                StreamServer {
                    label: "Pixeldrain".into(),
                    resolution: "720p".into(),
                    direct_url: Some("https://pd.example/a.mp4".into()),
                    server_id: None,
                },
                StreamServer {
                    label: "Mega".into(),
                    resolution: "480p".into(),
                    direct_url: None,
                    server_id: Some("m-480".into()),
                },
            ]
        );
    }

    #[test]
    fn test_server_id_spellings() {
        for key in ["serverId", "id", "mirrorId", "hash", "server_id", "_id", "linkId"] {
            let mut item = serde_json::Map::new();
            item.insert(key.to_string(), json!("srv-1"));
            let server = stream_server(&Value::Object(item), None).unwrap();
            assert_eq!(server.server_id.as_deref(), Some("srv-1"), "key {}", key);
            assert_eq!(server.resolution, "Standard");
            assert_eq!(server.label, "Server");
        }
    }

    #[test]
    fn test_list_key_priority_and_title_default() {
        let json = json!({
            "status": "Ok",
            "data": {
                "server_list": [{ "serverId": "from-server-list" }],
                "url_list": [{ "serverId": "from-url-list" }]
            }
        });

        let stream = normalize_stream(&json, "ep-9").unwrap();
        assert_eq!(stream.title, "ep-9");
        assert_eq!(stream.servers.len(), 1);
        assert_eq!(stream.servers[0].server_id.as_deref(), Some("from-server-list"));
    }

    #[test]
    fn test_nested_quality_shape() {
        let json = json!({
            "status": "Ok",
            "data": {
                "title": "X 3",
                "server": {
                    "qualities": [
                        {
                            "title": "360p",
                            "serverList": [{ "title": "ondesu", "serverId": "a1" }]
                        },
                        {
                            "title": "720p",
                            "serverList": [
                                { "title": "filedon", "serverId": "b2" },
                                { "title": "empty" }
                            ]
                        }
                    ]
                }
            }
        });

        let stream = normalize_stream(&json, "x-3").unwrap();
        let summary: Vec<_> = stream
            .servers
            .iter()
            .map(|s| (s.label.as_str(), s.resolution.as_str(), s.server_id.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![("ondesu", "360p", Some("a1")), ("filedon", "720p", Some("b2"))]
        );
    }

    #[test]
    fn test_protocol_relative_direct_url() {
        let item = json!({ "url": "//cdn.example/v.mp4" });
        let server = stream_server(&item, Some("1080p")).unwrap();
        assert_eq!(server.direct_url.as_deref(), Some("https://cdn.example/v.mp4"));
        assert_eq!(server.resolution, "1080p");
    }

    #[test]
    fn test_unrecognized_stream_is_absent() {
        assert!(normalize_stream(&json!({ "status": "Error", "data": {} }), "e").is_none());
        assert!(normalize_stream(&json!({ "status": "Ok", "data": "text" }), "e").is_none());

        let json = json!({ "status": "Ok", "data": { "title": "T" } });
        let empty = normalize_stream(&json, "e").unwrap();
        assert!(empty.servers.is_empty());
    }
}
