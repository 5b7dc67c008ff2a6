//! Route tables for the media server's REST API.

use std::sync::Arc;

use crate::endpoint::{Endpoint, RestEndpoint};

pub fn items() -> RestEndpoint {
    RestEndpoint::new("items")
        .get("getItems", "/Items")
        .get("getItemsByUserId", "/Users/{userId}/Items")
        .get("getResumeItems", "/UserItems/Resume")
}

pub fn user_library() -> RestEndpoint {
    RestEndpoint::new("user_library")
        .get("getItem", "/Items/{itemId}")
        .get("getLatestMedia", "/Items/Latest")
        .get("getIntros", "/Items/{itemId}/Intros")
        .post("markFavoriteItem", "/UserFavoriteItems/{itemId}")
        .delete("unmarkFavoriteItem", "/UserFavoriteItems/{itemId}")
}

pub fn user_views() -> RestEndpoint {
    RestEndpoint::new("user_views").get("getUserViews", "/UserViews")
}

pub fn tv_shows() -> RestEndpoint {
    RestEndpoint::new("tv_shows")
        .get("getSeasons", "/Shows/{seriesId}/Seasons")
        .get("getEpisodes", "/Shows/{seriesId}/Episodes")
        .get("getNextUp", "/Shows/NextUp")
}

pub fn genres() -> RestEndpoint {
    RestEndpoint::new("genres")
        .get("getGenres", "/Genres")
        .get("getGenre", "/Genres/{genreName}")
}

pub fn persons() -> RestEndpoint {
    RestEndpoint::new("persons")
        .get("getPersons", "/Persons")
        .get("getPerson", "/Persons/{name}")
}

pub fn artists() -> RestEndpoint {
    RestEndpoint::new("artists")
        .get("getAlbumArtists", "/Artists/AlbumArtists")
        .get("getArtists", "/Artists")
}

pub fn system() -> RestEndpoint {
    RestEndpoint::new("system")
        .get("getPublicSystemInfo", "/System/Info/Public")
        .get("getSystemInfo", "/System/Info")
}

/// Every built-in route table.
pub fn tables() -> Vec<RestEndpoint> {
    vec![
        items(),
        user_library(),
        user_views(),
        tv_shows(),
        genres(),
        persons(),
        artists(),
        system(),
    ]
}

/// Every built-in endpoint, for lookup by name.
pub fn all() -> Vec<Arc<dyn Endpoint>> {
    tables()
        .into_iter()
        .map(|table| Arc::new(table) as Arc<dyn Endpoint>)
        .collect()
}

/// Find a built-in endpoint by name.
pub fn by_name(name: &str) -> Option<Arc<dyn Endpoint>> {
    all().into_iter().find(|e| e.name() == name)
}
