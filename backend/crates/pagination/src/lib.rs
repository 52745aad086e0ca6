//! Keyset pagination primitives shared by the listing endpoints.
//!
//! Cursors are opaque to clients: the server serialises the ordering key of
//! the last row on a page to JSON and encodes it as unpadded base64url. A
//! [`PageRequest`] normalises the client-supplied limit, and a [`Page`]
//! carries the rows plus the links needed to continue.

mod cursor;
mod envelope;

pub use cursor::{Cursor, CursorError};
pub use envelope::{Page, PageLinks, PageRequest, PageRequestError};

/// Page size applied when the client does not request one.
pub const DEFAULT_LIMIT: usize = 20;

/// Upper bound on the page size a client may request.
pub const MAX_LIMIT: usize = 100;
