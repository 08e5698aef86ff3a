mod user_right_ext;

pub use user_right_ext::UserRightExt;
