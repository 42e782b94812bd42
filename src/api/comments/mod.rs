//! Comment handlers. Routes are registered under /api/recipes/{id}/comments
//! by the recipes router.

pub mod create;
pub mod list;

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(create::create_comment, list::list_comments),
    components(schemas(
        create::CreateCommentRequest,
        create::CreateCommentResponse,
        list::CommentView,
        list::ListCommentsResponse,
    ))
)]
pub struct ApiDoc;
