//! Article helpers exposed to templates.
//!
//! | Function                          | Returns                                  |
//! |-----------------------------------|------------------------------------------|
//! | `collection(path, pin)`           | published articles of `path` with `pin`  |
//! | `article_collection(path)`        | published, unpinned articles of `path`   |
//! | `pin_collection(path)`            | published, pinned articles of `path`     |
//! | `tags(articles)`                  | distinct tags, sorted                    |
//! | `limit(size, list)`               | first `size` entries of `list`           |
//! | `order_by_date(dir, list)`        | `list` sorted by date, `"desc"` or asc   |
//!
//! ```text
//! {% for article in limit(size=3, list=order_by_date(dir="desc", list=article_collection(path="blog"))) %}
//! ```

use super::{Article, ArticleIndex};
use crate::{
    engine::{FunctionMap, SharedFunction},
    utils::date::parse_date,
};
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use tera::{Value, from_value, to_value};

// ============================================================================
// Helpers
// ============================================================================

/// Published articles of the directory `path` whose pin flag equals `pin`.
///
/// `path` is relative to the content root; surrounding slashes are ignored.
pub fn collection(index: &ArticleIndex, path: &str, pin: bool) -> Vec<Article> {
    index
        .get(path.trim_matches('/'))
        .into_iter()
        .filter(|a| a.published && a.pin == pin)
        .collect()
}

/// Distinct tags of `articles`, sorted lexicographically.
pub fn tags(articles: &[Article]) -> Vec<String> {
    articles
        .iter()
        .flat_map(|a| a.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// At most the first `size` entries of `list`.
pub fn limit<T: Clone>(size: usize, list: &[T]) -> Vec<T> {
    list[..size.min(list.len())].to_vec()
}

/// Stable sort by parsed date: newest first for `"desc"`, oldest first for
/// anything else. Unparsable dates count as the earliest date.
pub fn order_by_date(dir: &str, mut list: Vec<Article>) -> Vec<Article> {
    if dir == "desc" {
        list.sort_by(|a, b| parse_date(&b.date).cmp(&parse_date(&a.date)));
    } else {
        list.sort_by_key(|a| parse_date(&a.date));
    }
    list
}

// ============================================================================
// Template Bindings
// ============================================================================

/// Template functions backed by `index`.
pub fn functions(index: &ArticleIndex) -> FunctionMap {
    let mut map = FunctionMap::new();

    let idx = index.clone();
    map.insert(
        "collection".into(),
        SharedFunction::new(move |args: &HashMap<String, Value>| {
            let path: String = arg(args, "collection", "path")?;
            let pin: bool = arg(args, "collection", "pin")?;
            to_tera(&collection(&idx, &path, pin))
        }),
    );

    let idx = index.clone();
    map.insert(
        "article_collection".into(),
        SharedFunction::new(move |args: &HashMap<String, Value>| {
            let path: String = arg(args, "article_collection", "path")?;
            to_tera(&collection(&idx, &path, false))
        }),
    );

    let idx = index.clone();
    map.insert(
        "pin_collection".into(),
        SharedFunction::new(move |args: &HashMap<String, Value>| {
            let path: String = arg(args, "pin_collection", "path")?;
            to_tera(&collection(&idx, &path, true))
        }),
    );

    map.insert(
        "tags".into(),
        SharedFunction::new(|args: &HashMap<String, Value>| {
            let articles: Vec<Article> = arg(args, "tags", "articles")?;
            to_tera(&tags(&articles))
        }),
    );

    map.insert(
        "limit".into(),
        SharedFunction::new(|args: &HashMap<String, Value>| {
            let size: usize = arg(args, "limit", "size")?;
            let list: Vec<Value> = arg(args, "limit", "list")?;
            to_tera(&limit(size, &list))
        }),
    );

    map.insert(
        "order_by_date".into(),
        SharedFunction::new(|args: &HashMap<String, Value>| {
            let dir: String = arg(args, "order_by_date", "dir")?;
            let list: Vec<Article> = arg(args, "order_by_date", "list")?;
            to_tera(&order_by_date(&dir, list))
        }),
    );

    map
}

/// Required, typed keyword argument.
pub(crate) fn arg<T: DeserializeOwned>(
    args: &HashMap<String, Value>,
    function: &str,
    name: &str,
) -> tera::Result<T> {
    let value = args.get(name).ok_or_else(|| {
        tera::Error::msg(format!("`{function}` requires the `{name}` argument"))
    })?;
    from_value(value.clone()).map_err(|err| {
        tera::Error::msg(format!("`{function}`: invalid `{name}` argument: {err}"))
    })
}

pub(crate) fn to_tera<T: serde::Serialize>(value: &T) -> tera::Result<Value> {
    to_value(value).map_err(|err| tera::Error::msg(err.to_string()))
}
