use super::grouping::Bucket;

/// Separator between links inside one report cell.
pub const LINK_SEPARATOR: &str = " \n ";

/// Strips the commit hash from a commit web URL, keeping the trailing slash.
///
/// # Arguments
///
/// * `web_url` - Canonical commit URL (e.g., <https://gitlab.com/group/project/-/commit/abc123>)
///
/// # Returns
///
/// The URL prefix commits of the same project share
/// (e.g., <https://gitlab.com/group/project/-/commit/>)
pub fn commit_base_url(web_url: &str) -> &str {
    match web_url.rfind('/') {
        Some(idx) => &web_url[..=idx],
        None => "",
    }
}

pub fn commit_url(base_url: &str, sha: &str) -> String {
    format!("{base_url}{sha}")
}

/// Links to every commit event of the bucket, built from one known commit URL.
pub fn commit_links(bucket: &Bucket, base_url: &str) -> Vec<String> {
    bucket
        .commit_events()
        .filter_map(|event| event.commit_to())
        .map(|sha| commit_url(base_url, sha))
        .collect()
}

/// Distinct merge request URLs of the bucket in first-seen order.
pub fn merge_request_links(bucket: &Bucket) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    for mr in bucket
        .events()
        .iter()
        .filter_map(|event| event.merge_request.as_deref())
    {
        if !links.iter().any(|link| link == &mr.web_url) {
            links.push(mr.web_url.clone());
        }
    }

    links
}
