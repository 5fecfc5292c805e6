// Stub keys

use std::fmt;

use crate::call::TypeTag;
use crate::signature::Signature;

/// Registry key: signature plus the member's input and output types
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StubKey {
    pub signature: Signature,
    pub input: TypeTag,
    pub output: TypeTag,
}

impl StubKey {
    pub fn of<I: 'static, O: 'static>(signature: impl Into<Signature>) -> Self {
        Self {
            signature: signature.into(),
            input: TypeTag::of::<I>(),
            output: TypeTag::of::<O>(),
        }
    }

    /// Same key with the signature collapsed to its name
    pub fn abbreviated(&self) -> Self {
        Self {
            signature: self.signature.abbreviated(),
            input: self.input,
            output: self.output,
        }
    }

    /// Ordering used for deterministic dumps
    pub(crate) fn sort_key(&self) -> (String, String, String) {
        (
            self.signature.text().to_string(),
            self.input.name(),
            self.output.name(),
        )
    }
}

impl fmt::Debug for StubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "signature: {}, input: {}, output: {}",
            self.signature, self.input, self.output
        )
    }
}
