use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, error, warn};

use super::{OsmNode, OsmNodeFetcher, OsmNodeNotFound};
use crate::config::OsmConfig;

const USER_AGENT: &str = concat!("campus-coffee/", env!("CARGO_PKG_VERSION"));

/// Client for the OpenStreetMap v0.6 API.
///
/// Fetches `GET {base}/node/{id}` and parses the XML payload into an
/// [`OsmNode`]. Expected document shape:
///
/// ```xml
/// <osm>
///   <node id="..." lat="..." lon="...">
///     <tag k="name" v="..."/>
///     <tag k="addr:street" v="..."/>
///   </node>
/// </osm>
/// ```
#[derive(Debug, Clone)]
pub struct OsmApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl OsmApiClient {
    pub fn new(config: &OsmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl OsmNodeFetcher for OsmApiClient {
    async fn fetch_node(&self, node_id: i64) -> Result<OsmNode, OsmNodeNotFound> {
        let url = format!("{}/node/{}", self.base_url, node_id);
        debug!(node_id, %url, "fetching OSM node");

        let response = self.client.get(&url).send().await.map_err(|err| {
            error!(node_id, %err, "OSM API request failed");
            OsmNodeNotFound(node_id)
        })?;

        if !response.status().is_success() {
            warn!(node_id, status = %response.status(), "OSM API returned an error status");
            return Err(OsmNodeNotFound(node_id));
        }

        let body = response.text().await.map_err(|err| {
            error!(node_id, %err, "failed to read OSM API response body");
            OsmNodeNotFound(node_id)
        })?;

        if body.trim().is_empty() {
            warn!(node_id, "empty response from OSM API");
            return Err(OsmNodeNotFound(node_id));
        }

        parse_node_xml(&body, node_id)
    }
}

/// Parse the node document, insisting that the returned node id matches
/// the requested one.
fn parse_node_xml(xml: &str, node_id: i64) -> Result<OsmNode, OsmNodeNotFound> {
    let mut reader = Reader::from_str(xml);
    let mut found_id: Option<i64> = None;
    let mut tags: HashMap<String, String> = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                match element.name().as_ref() {
                    b"node" => {
                        for attr in element.attributes() {
                            let attr = attr.map_err(|err| {
                                warn!(node_id, %err, "bad attribute in OSM API response");
                                OsmNodeNotFound(node_id)
                            })?;
                            if attr.key.as_ref() == b"id" {
                                found_id = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|raw| raw.trim().parse::<i64>().ok());
                            }
                        }
                    }
                    b"tag" => {
                        let mut key = None;
                        let mut value = None;
                        for attr in element.attributes() {
                            let attr = attr.map_err(|err| {
                                warn!(node_id, %err, "bad attribute in OSM API response");
                                OsmNodeNotFound(node_id)
                            })?;
                            let text = attr.unescape_value().map_err(|err| {
                                warn!(node_id, %err, "unreadable attribute value");
                                OsmNodeNotFound(node_id)
                            })?;
                            match attr.key.as_ref() {
                                b"k" => key = Some(text.into_owned()),
                                b"v" => value = Some(text.into_owned()),
                                _ => {}
                            }
                        }
                        if let (Some(key), Some(value)) = (key, value) {
                            tags.insert(key, value);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(node_id, %err, "invalid XML in OSM API response");
                return Err(OsmNodeNotFound(node_id));
            }
        }
    }

    match found_id {
        Some(id) if id == node_id => {
            debug!(node_id, tag_count = tags.len(), "parsed OSM node");
            Ok(OsmNode::new(node_id, tags))
        }
        Some(other) => {
            warn!(node_id, returned_id = other, "OSM API returned a different node");
            Err(OsmNodeNotFound(node_id))
        }
        None => {
            warn!(node_id, "no node element in OSM API response");
            Err(OsmNodeNotFound(node_id))
        }
    }
}
