/*!
Error type returned from the binary's `main`.

`main` prints its error with `Debug`, so this wrapper formats the error
followed by every error in its `source()` chain.
*/

use std::{error::Error as StdError, fmt};

pub struct Report(Box<dyn StdError>);

impl Report {
    /// Errors that caused this one, outermost first.
    pub fn causes(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(self.0.source(), |&cause| cause.source())
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.0)?;

        let mut causes = self.causes().enumerate().peekable();
        if causes.peek().is_some() {
            writeln!(f, "\nCaused by:")?;
        }
        for (depth, cause) in causes {
            writeln!(f, "  {}: {}", depth, cause)?;
        }

        Ok(())
    }
}

impl<E: Into<Box<dyn StdError>>> From<E> for Report {
    fn from(e: E) -> Self {
        Report(e.into())
    }
}
