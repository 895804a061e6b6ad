use url::Url;

use crate::types::VideoId;

const SHORT_LINK_HOST: &str = "youtu.be";
const MAIN_HOSTS: [&str; 3] = ["www.youtube.com", "youtube.com", "m.youtube.com"];
const PATH_PREFIXES: [&str; 2] = ["/embed/", "/v/"];

/// Extract the video ID from the URL shapes YouTube hands out.
///
/// Returns `None` for anything unrecognized, including strings that are not URLs at all.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let url = Url::parse(input.trim()).ok()?;
    let host = url.host_str()?;
    let path = url.path();

    let id = if host == SHORT_LINK_HOST {
        path.strip_prefix('/').unwrap_or(path).to_string()
    } else if MAIN_HOSTS.contains(&host) {
        if path == "/watch" {
            url.query_pairs()
                .find(|(key, value)| key == "v" && !value.is_empty())
                .map(|(_, value)| value.into_owned())?
        } else {
            let rest = PATH_PREFIXES
                .iter()
                .find_map(|prefix| path.strip_prefix(prefix))?;
            rest.split('/').next().unwrap_or_default().to_string()
        }
    } else {
        return None;
    };

    if id.is_empty() {
        return None;
    }
    Some(VideoId::new(id))
}
