// Core upload logic, independent of the HTTP layer

pub mod templater;
pub mod uploader;
pub mod validator;
