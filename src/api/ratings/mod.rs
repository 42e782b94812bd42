//! Rating handlers. The route is registered under /api/recipes/{id}/rating
//! by the recipes router.

pub mod rate;

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(rate::rate_recipe),
    components(schemas(rate::RateRecipeRequest, rate::RateRecipeResponse))
)]
pub struct ApiDoc;
