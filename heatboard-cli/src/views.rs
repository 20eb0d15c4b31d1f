use serde::Serialize;

use crate::util::split_csv;

/// One report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Leaders,
    Ranks,
    Scores,
    Missions,
    Stats,
}

const CATALOG: [(View, &str, &str); 5] = [
    (View::Leaders, "leaders", "Selected day's top entries with decoded run details"),
    (View::Ranks, "ranks", "Rank history of top performers across the window"),
    (View::Scores, "scores", "Score distribution for the selected day"),
    (View::Missions, "missions", "Missions-completed buckets for the selected day"),
    (View::Stats, "stats", "Searchable all-time player stats table"),
];

impl View {
    pub fn key(self) -> &'static str {
        CATALOG
            .iter()
            .find(|(view, _, _)| *view == self)
            .map_or("", |(_, key, _)| key)
    }

    fn from_key(key: &str) -> Option<Self> {
        CATALOG
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(key))
            .map(|(view, _, _)| *view)
    }
}

pub fn list_views() -> impl Iterator<Item = (&'static str, &'static str)> {
    CATALOG.iter().map(|(_, key, description)| (*key, *description))
}

/// Parse a comma-separated view list. `all` expands to every view; duplicates
/// are dropped. Unknown names are returned separately.
pub fn expand_views(views_arg: &str) -> (Vec<View>, Vec<String>) {
    let mut views = Vec::new();
    let mut unknown = Vec::new();
    for name in split_csv(views_arg) {
        let expanded: Vec<View> = if name.eq_ignore_ascii_case("all") {
            CATALOG.iter().map(|(view, _, _)| *view).collect()
        } else if let Some(view) = View::from_key(&name) {
            vec![view]
        } else {
            unknown.push(name);
            continue;
        };
        for view in expanded {
            if !views.contains(&view) {
                views.push(view);
            }
        }
    }
    (views, unknown)
}
