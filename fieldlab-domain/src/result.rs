use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
};

/// What went wrong, in terms callers can match on. The store never catches or
/// retries any of these, they always surface synchronously.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum ErrorKind {
    /// wrong click count passed to a label kind's constructor
    Arity,
    /// removal or lookup of an image/label that is not in the store
    NotFound,
    /// property set with an incompatible or unparsable value
    TypeMismatch,
    Io,
    Decode,
    Encode,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct FlError {
    kind: ErrorKind,
    msg: String,
}
impl FlError {
    pub fn new(kind: ErrorKind, msg: &str) -> FlError {
        FlError {
            kind,
            msg: msg.to_string(),
        }
    }
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
    pub fn msg(&self) -> &str {
        &self.msg
    }
}
impl Display for FlError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}
impl Error for FlError {}

/// Fieldlab's result type with [`FlError`](FlError) as error type.
pub type FlResult<U> = Result<U, FlError>;

/// Creates an [`FlError`](FlError) of the given kind with a formatted message.
/// ```rust
/// # use std::error::Error;
/// use fieldlab_domain::{flerr, result::{ErrorKind, FlError}};
/// # fn main() -> Result<(), Box<dyn Error>> {
/// assert_eq!(
///     flerr!(NotFound, "no image at {}", 1),
///     FlError::new(ErrorKind::NotFound, format!("no image at {}", 1).as_str())
/// );
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! flerr {
    ($kind:ident, $s:literal) => {
        $crate::result::FlError::new($crate::result::ErrorKind::$kind, format!($s).as_str())
    };
    ($kind:ident, $s:literal, $( $exps:expr ),*) => {
        $crate::result::FlError::new(
            $crate::result::ErrorKind::$kind,
            format!($s, $($exps,)*).as_str(),
        )
    }
}

/// Wraps a foreign error into an [`FlError`](FlError) of the given kind, for use
/// with `map_err`.
pub fn to_fl<E: Debug>(kind: ErrorKind) -> impl Fn(E) -> FlError {
    move |e| {
        FlError::new(
            kind,
            format!(
                "original error type is '{}', error message is '{e:?}'",
                std::any::type_name::<E>()
            )
            .as_str(),
        )
    }
}
