use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Association between a user and a movie.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    /// Id of the user
    #[schema(example = 42)]
    pub id_user: i64,
    /// Id of movie
    #[schema(example = 1)]
    pub id_movie: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FavoriteMovie {
    /// Id of movie
    #[schema(example = 1)]
    pub id_movie: i64,
}
