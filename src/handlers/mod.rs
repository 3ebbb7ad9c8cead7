// Two security tiers: public token acquisition (/auth/*) and
// JWT-protected resource surfaces (/projects, /tasks).
pub mod protected;
pub mod public;
