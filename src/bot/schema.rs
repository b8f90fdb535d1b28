use teloxide::{dispatching::UpdateHandler, prelude::*};

use super::{
    commands::{self, Command},
    uploads, HandlerError,
};

/// Builds the dispatcher handler tree.
///
/// Commands are answered first; any remaining message carrying a supported
/// attachment is relayed to storage. Everything else falls through to the
/// default handler.
pub fn schema() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(commands::handle_command),
        )
        .branch(
            dptree::filter_map(|msg: Message| uploads::extract_attachment(&msg))
                .endpoint(uploads::handle_attachment),
        )
}
