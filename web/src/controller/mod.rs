pub(crate) mod health_check_controller;
pub(crate) mod home_controller;
pub(crate) mod login_controller;
