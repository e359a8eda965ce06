pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error("Chroma responded with {status}: {body}")]
	Status { status: reqwest::StatusCode, body: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
