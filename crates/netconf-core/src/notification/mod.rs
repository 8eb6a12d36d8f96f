//! Change notifications for subsystems

pub mod change;
pub mod executor;

pub use change::{
    ChangeNotification, CopyConfigChangeNotification, EditConfigChangeNotification,
    NotificationContext, NotificationInfo,
};
pub use executor::{
    refine_and_add, SubsystemBatch, SubsystemNotificationExecutor, SubsystemNotifications,
};
