pub mod folder_item;
pub mod folder_list;
pub mod settings_panel;
pub mod widget;
