// Route handlers. Everything here sits behind the JWT middleware; the public
// `/` and `/health` endpoints live next to the router in `app`.
pub mod chat;
