use exchange_shared::CalendarFolder;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FolderItemProps {
    pub folder: CalendarFolder,
    pub on_toggle: Callback<(String, bool)>,
}

#[function_component(FolderItem)]
pub fn folder_item(props: &FolderItemProps) -> Html {
    let folder = &props.folder;

    let on_change = {
        let folder_id = folder.id.clone();
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_toggle.emit((folder_id.clone(), input.checked()));
        })
    };

    html! {
        <div class="ExchangeSettingsFolder">
            <label>
                { &folder.name }
                <input
                    type="checkbox"
                    name={folder.name.clone()}
                    value={folder.id.clone()}
                    checked={folder.synchronized_folder}
                    onchange={on_change}
                />
            </label>
        </div>
    }
}
