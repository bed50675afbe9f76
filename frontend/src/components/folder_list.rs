use yew::prelude::*;

use crate::components::folder_item::FolderItem;
use crate::state::{ListContent, NOT_CONNECTED_MESSAGE};

#[derive(Properties, PartialEq)]
pub struct FolderListProps {
    pub content: ListContent,
    pub show_sync_now: bool,
    pub on_toggle: Callback<(String, bool)>,
    pub on_sync_now: Callback<()>,
}

#[function_component(FolderList)]
pub fn folder_list(props: &FolderListProps) -> Html {
    let folders = match &props.content {
        ListContent::Loading => {
            return html! {
                <div class="ExchangeSettingsContent">
                    <div class="ExchangeSettingsLoading">{ "Loading..." }</div>
                </div>
            };
        }
        ListContent::NotConnected => {
            return html! {
                <div class="ExchangeSettingsContent">
                    <div class="ExchangeSettingsError">{ NOT_CONNECTED_MESSAGE }</div>
                </div>
            };
        }
        ListContent::Folders(folders) => folders,
    };

    let on_sync_now = props.on_sync_now.reform(|_: MouseEvent| ());

    html! {
        <div class="ExchangeSettingsContent">
            { for folders.iter().map(|folder| {
                html! {
                    <FolderItem
                        key={folder.id.clone()}
                        folder={folder.clone()}
                        on_toggle={props.on_toggle.clone()}
                    />
                }
            })}
            if props.show_sync_now {
                <button type="button" class="btn ExchangeSyncNowButton" onclick={on_sync_now}>
                    { "Synchronize now" }
                </button>
            }
        </div>
    }
}
