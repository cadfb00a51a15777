//! `boxsort://box?uuid=<id>` deep links.
use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;
use url::{Url, form_urlencoded};

use crate::domain::StorageBox;
use crate::repo::BoxRepo;

pub const SCHEME: &str = "boxsort";
pub const HOST: &str = "box";
pub const UUID_PARAM: &str = "uuid";

/// Why a string is not a box link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedLink {
    #[error("not a URI")]
    Unparseable,

    #[error("scheme {0:?} is not boxsort")]
    WrongScheme(String),

    #[error("host {0:?} is not box")]
    WrongHost(Option<String>),

    #[error("missing uuid parameter")]
    MissingUuid,
}

/// Outcome of opening a link, before the presentation layer decides how to
/// phrase it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Found(&'a StorageBox),
    NotFound { uuid: String },
    Malformed(MalformedLink),
}

impl<'a> Resolution<'a> {
    pub fn into_box(self) -> Option<&'a StorageBox> {
        match self {
            Resolution::Found(b) => Some(b),
            _ => None,
        }
    }
}

/// Extract the target id from a box link.
///
/// The scheme is compared case-insensitively, the host exactly. When `uuid`
/// repeats, the last occurrence wins; a bare `uuid` without a value counts
/// as missing.
pub fn parse_box_link(uri: &str) -> Result<String, MalformedLink> {
    let url = Url::parse(uri.trim()).map_err(|_| MalformedLink::Unparseable)?;
    if !url.scheme().eq_ignore_ascii_case(SCHEME) {
        return Err(MalformedLink::WrongScheme(url.scheme().to_string()));
    }
    if url.host_str() != Some(HOST) {
        return Err(MalformedLink::WrongHost(url.host_str().map(str::to_string)));
    }
    let mut params: HashMap<String, Option<String>> = HashMap::new();
    for pair in url.query().unwrap_or("").split('&').filter(|p| !p.is_empty()) {
        let Some((key, value)) = form_urlencoded::parse(pair.as_bytes()).next() else {
            continue;
        };
        // A bare `uuid` with no `=` carries no value and clears earlier ones.
        let value = pair.contains('=').then(|| value.into_owned());
        params.insert(key.into_owned(), value);
    }
    params
        .remove(UUID_PARAM)
        .flatten()
        .ok_or(MalformedLink::MissingUuid)
}

pub fn resolve<'a, R: BoxRepo + ?Sized>(repo: &'a R, uri: &str) -> Resolution<'a> {
    let uuid = match parse_box_link(uri) {
        Ok(u) => u,
        Err(e) => {
            debug!(%uri, reason = %e, "not a box link");
            return Resolution::Malformed(e);
        }
    };
    match repo.find_by_id(&uuid) {
        Some(b) => Resolution::Found(b),
        None => {
            debug!(%uuid, "no box for link");
            Resolution::NotFound { uuid }
        }
    }
}

/// The box a link points at, if any. Malformed and unknown links both yield
/// `None`.
pub fn resolve_box<R: BoxRepo + ?Sized>(repo: &R, uri: &str) -> Option<StorageBox> {
    resolve(repo, uri).into_box().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoxDraft;
    use crate::repo_mem::MemBoxRepo;

    fn repo_with(names: &[&str]) -> MemBoxRepo {
        let mut repo = MemBoxRepo::new();
        for n in names {
            repo.insert(BoxDraft::named(*n).validate().unwrap()).unwrap();
        }
        repo
    }

    #[test]
    fn parses_uuid_param() {
        assert_eq!(parse_box_link("boxsort://box?uuid=ABC").unwrap(), "ABC");
        assert_eq!(parse_box_link("BOXSORT://box?uuid=ABC").unwrap(), "ABC");
        assert_eq!(
            parse_box_link("boxsort://box?uuid=first&x=1&uuid=last").unwrap(),
            "last"
        );
        assert_eq!(parse_box_link("boxsort://box?uuid=a%2Db").unwrap(), "a-b");
    }

    #[test]
    fn classifies_bad_links() {
        assert_eq!(parse_box_link("not a uri"), Err(MalformedLink::Unparseable));
        assert_eq!(
            parse_box_link("other://box?uuid=ABC"),
            Err(MalformedLink::WrongScheme("other".into()))
        );
        assert_eq!(
            parse_box_link("boxsort://Box?uuid=ABC"),
            Err(MalformedLink::WrongHost(Some("Box".into())))
        );
        assert_eq!(
            parse_box_link("boxsort://item?uuid=ABC"),
            Err(MalformedLink::WrongHost(Some("item".into())))
        );
        assert_eq!(parse_box_link("boxsort://box"), Err(MalformedLink::MissingUuid));
        assert_eq!(
            parse_box_link("boxsort://box?uuid"),
            Err(MalformedLink::MissingUuid)
        );
        assert_eq!(
            parse_box_link("boxsort://box?uuid=ABC&uuid"),
            Err(MalformedLink::MissingUuid)
        );
        assert_eq!(parse_box_link("boxsort://box?uuid=").unwrap(), "");
        assert_eq!(
            parse_box_link("boxsort://box?id=ABC"),
            Err(MalformedLink::MissingUuid)
        );
    }

    #[test]
    fn resolves_existing_box() {
        let repo = repo_with(&["Garage", "Kitchen"]);
        let target = repo.boxes()[1].clone();
        let uri = format!("boxsort://box?uuid={}", target.id);
        assert_eq!(resolve(&repo, &uri), Resolution::Found(&target));

        let upper = format!("BOXSORT://box?uuid={}", target.id);
        assert_eq!(resolve_box(&repo, &upper), Some(target));
    }

    #[test]
    fn unknown_and_malformed_are_distinct_but_both_empty() {
        let repo = repo_with(&["Garage"]);
        let r = resolve(&repo, "boxsort://box?uuid=ABC");
        assert_eq!(
            r,
            Resolution::NotFound {
                uuid: "ABC".into()
            }
        );
        assert!(r.into_box().is_none());

        let r = resolve(&repo, "other://box?uuid=ABC");
        assert!(matches!(r, Resolution::Malformed(MalformedLink::WrongScheme(_))));
        assert!(resolve_box(&repo, "boxsort://box").is_none());
        assert!(resolve_box(&repo, "::::").is_none());
    }
}
