use anyhow::Result;

pub mod ur;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}
