use serde_json::{Value, json};

/// A result-list entry in TMDB's shape.
#[must_use]
pub fn movie_json(id: u64) -> Value {
    json!({
        "id": id,
        "title": format!("Movie #{id}"),
        "overview": null,
        "poster_path": format!("/poster-{id}.jpg"),
        "genre_ids": [28, 12],
        "release_date": "1999-03-31",
        "vote_average": 7.5
    })
}

/// A page of results in TMDB's shape.
#[must_use]
pub fn results_page(page: u64, ids: &[u64], total_results: u64) -> Value {
    json!({
        "page": page,
        "results": ids.iter().copied().map(movie_json).collect::<Vec<_>>(),
        "total_pages": total_results.div_ceil(20),
        "total_results": total_results
    })
}

/// TMDB's error body.
#[must_use]
pub fn error_json(status_code: u64, message: &str) -> Value {
    json!({
        "success": false,
        "status_code": status_code,
        "status_message": message
    })
}
