use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("card UID is empty")]
    EmptyUid,

    #[error("card UID '{uid}' is {len} characters, slot width is {max}")]
    UidTooLong { uid: String, len: usize, max: usize },

    #[error("card UID contains non-hexadecimal character '{found}'")]
    InvalidUidChar { found: char },
}

pub type Result<T> = std::result::Result<T, Error>;
