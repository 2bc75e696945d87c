mod documents;
mod helpers;
