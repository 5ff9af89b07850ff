use crate::cddb::error::NetworkError;
use crate::config::CddbConfig;
use crate::toc::TableOfContents;
use reqwest::Url;

const QUERY_COMMAND: &str = "cddb query";

/// One request to the CDDB cgi endpoint.
///
/// Fields are sent as url query parameters; the form encoder turns the
/// spaces into `+`, which is the separator the protocol expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CddbRequest {
    pub cmd: String,
    pub hello: String,
    pub proto: String,
}

impl CddbRequest {
    pub fn query(toc: &TableOfContents, config: &CddbConfig) -> Self {
        Self {
            cmd: query_command(toc),
            hello: config.hello(),
            proto: config.protocol_level.to_string(),
        }
    }

    pub fn params(&self) -> [(&'static str, &str); 3] {
        [
            ("cmd", self.cmd.as_str()),
            ("hello", self.hello.as_str()),
            ("proto", self.proto.as_str()),
        ]
    }

    pub fn url(&self, server_url: &str) -> Result<Url, NetworkError> {
        Url::parse_with_params(server_url, self.params()).map_err(|err| {
            NetworkError::InvalidUrl {
                url: server_url.to_string(),
                reason: err.to_string(),
            }
        })
    }
}

/// `cddb query <disc id> <track count> <track starts...> <total seconds>`
pub fn query_command(toc: &TableOfContents) -> String {
    let mut cmd = format!("{QUERY_COMMAND} {} {}", toc.disc_id(), toc.track_count());

    for start in toc.track_start_frames() {
        cmd.push(' ');
        cmd.push_str(&start.to_string());
    }

    cmd.push(' ');
    cmd.push_str(&toc.total_length_seconds().to_string());

    cmd
}
