// Resume rendering: stored answers resolved through the resume's chosen template.
// Resume CRUD, persistent profile data and PDF export live outside this service.

pub mod handlers;
