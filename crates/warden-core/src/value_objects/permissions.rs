//! Named capabilities granted through `user_permissions`

pub const FILE_PRESIGNED_URL: &str = "file:presigned-url";
pub const FILE_CONFIRM_UPLOAD: &str = "file:confirm-upload";
pub const FILE_LIST: &str = "file:list";
pub const FILE_DELETE: &str = "file:delete";

/// Every permission the system knows about
pub const ALL: &[&str] = &[
    FILE_PRESIGNED_URL,
    FILE_CONFIRM_UPLOAD,
    FILE_LIST,
    FILE_DELETE,
];

/// Check membership of a permission in a granted list
pub fn grants(granted: &[String], required: &str) -> bool {
    granted.iter().any(|p| p == required)
}
