pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod mine;
pub mod update;

use crate::api::{comments, favorites, ratings};
use crate::schema::{photos, recipes};
use crate::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use diesel::prelude::*;
use uuid::Uuid;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list::list_recipes).post(create::create_recipe),
        )
        .route("/mine", get(mine::my_recipes))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/comments",
            get(comments::list::list_comments).post(comments::create::create_comment),
        )
        .route("/{id}/rating", put(ratings::rate::rate_recipe))
        .route("/{id}/favorite", post(favorites::toggle::toggle_favorite))
}

/// SQL fragment computing the derived aggregate rating for the current
/// recipes row. Unrated recipes read as 0.
pub(crate) fn average_rating_sql(
) -> diesel::expression::SqlLiteral<diesel::sql_types::Double> {
    diesel::dsl::sql::<diesel::sql_types::Double>(
        "(SELECT COALESCE(AVG(ratings.rating), 0)::float8 FROM ratings \
         WHERE ratings.recipe_id = recipes.id)",
    )
}

/// Whether the recipe exists, is not deleted, and has been approved for
/// public visibility. Ratings, comments and favorites only apply to such
/// recipes.
pub(crate) fn recipe_is_approved(
    conn: &mut PgConnection,
    recipe_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    let status: Option<String> = recipes::table
        .filter(recipes::id.eq(recipe_id))
        .filter(recipes::deleted_at.is_null())
        .select(recipes::status)
        .first(conn)
        .optional()?;

    Ok(status.as_deref() == Some("approved"))
}

/// Whether the photo exists, is live, and was uploaded by the given user.
/// Recipes may only reference the submitter's own photos.
pub(crate) fn photo_owned_by(
    conn: &mut PgConnection,
    photo_id: Uuid,
    user_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    let found: Option<Uuid> = photos::table
        .filter(photos::id.eq(photo_id))
        .filter(photos::user_id.eq(user_id))
        .filter(photos::deleted_at.is_null())
        .select(photos::id)
        .first(conn)
        .optional()?;

    Ok(found.is_some())
}

/// Escape LIKE wildcards in user-supplied search text.
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{}%", term.replace('%', "\\%").replace('_', "\\_"))
}

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        mine::my_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
    ),
    components(schemas(
        create::CreateRecipeRequest,
        create::CreateRecipeResponse,
        list::ListRecipesResponse,
        list::PaginationMetadata,
        list::RecipeSummary,
        mine::MyRecipesResponse,
        mine::OwnRecipeSummary,
        get::RecipeResponse,
        update::UpdateRecipeRequest,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{insert_user, test_conn};
    use crate::models::NewPhoto;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("rice"), "%rice%");
    }

    #[test]
    fn test_photo_ownership_check() {
        let Some(mut conn) = test_conn() else { return };
        let owner = insert_user(&mut conn, "photo_owner");
        let stranger = insert_user(&mut conn, "photo_stranger");

        let photo_id: Uuid = diesel::insert_into(photos::table)
            .values(&NewPhoto {
                user_id: owner,
                content_type: "image/png",
                data: &[1, 2, 3],
                thumbnail: &[4, 5, 6],
            })
            .returning(photos::id)
            .get_result(&mut conn)
            .unwrap();

        assert!(photo_owned_by(&mut conn, photo_id, owner).unwrap());
        assert!(!photo_owned_by(&mut conn, photo_id, stranger).unwrap());
        assert!(!photo_owned_by(&mut conn, Uuid::new_v4(), owner).unwrap());
    }
}
