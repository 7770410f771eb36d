//! Screen modules for the billed TUI

pub mod bills;
pub mod help;
pub mod new_bill;

pub use bills::BillsScreen;
pub use help::HelpScreen;
pub use new_bill::NewBillScreen;
