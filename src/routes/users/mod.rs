mod handlers;

pub use handlers::{create_user, delete_user, get_user, list_users, update_user};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{
    __path_create_user, __path_delete_user, __path_get_user, __path_list_users,
    __path_update_user,
};
