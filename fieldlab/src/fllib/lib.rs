pub mod cfg;
pub mod database;
pub mod file_util;
pub mod labels;
pub mod props;
pub mod result;
pub mod tracing_setup;
pub use database::{DbEvent, DbListener, ImageDatabase, LabelRef, LabeledImage, LabelsMap};
pub use fieldlab_domain::{ErrorKind, FlError, FlResult, Point, PtI, TPtI};
pub use labels::{Label, LabelKindDescriptor, LabelRegistry, TeamColor};
pub use props::{get_prop, prop_descriptors, prop_rows, set_prop, PropDescriptor, PropVal};
