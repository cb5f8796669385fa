pub mod setup;

mod test_encrypt;
mod test_insert;
