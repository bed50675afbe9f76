use std::cell::RefCell;
use std::rc::Rc;

use exchange_shared::SettingsField;
use wasm_bindgen::JsCast;
use web_sys::{Element, Node};
use yew::functional::UseForceUpdateHandle;
use yew::prelude::*;

use crate::components::folder_list::FolderList;
use crate::components::settings_panel::SettingsPanel;
use crate::config::WidgetConfig;
use crate::services::api::ExchangeApi;
use crate::state::{Action, AnchorRect, Command, ConnectionIcon, Panel, PopupPosition, WidgetState};

#[derive(Properties, PartialEq)]
pub struct WidgetProps {
    pub config: Rc<WidgetConfig>,
    /// Toolbar element the button sits next to
    pub anchor: Element,
    pub popup_host: Element,
    pub mask_host: Element,
}

/// Applies actions to the shared state and runs the commands they produce.
#[derive(Clone)]
struct Controller {
    state: Rc<RefCell<WidgetState>>,
    api: Rc<ExchangeApi>,
    rerender: UseForceUpdateHandle,
}

impl Controller {
    fn dispatch(&self, action: Action) {
        let commands = self.state.borrow_mut().apply(action);
        self.rerender.force_update();

        for command in commands {
            tracing::debug!("Running {}", command.name());
            let controller = self.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Some(action) = controller.run(command).await {
                    controller.dispatch(action);
                }
            });
        }
    }

    async fn run(&self, command: Command) -> Option<Action> {
        match command {
            Command::FetchCalendars(purpose) => Some(Action::CalendarsLoaded {
                purpose,
                result: self.api.list_calendars().await,
            }),
            Command::FetchSettings => Some(Action::SettingsLoaded(self.api.get_settings().await)),
            Command::SaveSettings(settings) => Some(Action::SettingsSaved(
                self.api.save_settings(&settings).await,
            )),
            Command::SetFolderSync { folder_id, enabled } => {
                let result = self.api.set_folder_sync(&folder_id, enabled).await;
                Some(Action::FolderSyncFinished {
                    folder_id,
                    enabled,
                    result,
                })
            }
            Command::SyncNow => Some(Action::SyncNowFinished(self.api.sync_now().await)),
            Command::Alert(message) => {
                gloo::dialogs::alert(&message);
                None
            }
        }
    }
}

fn popup_position(anchor: &Element) -> PopupPosition {
    let rect = anchor.get_bounding_client_rect();
    let window = gloo::utils::window();
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let viewport_width = window
        .inner_width()
        .ok()
        .and_then(|width| width.as_f64())
        .unwrap_or_else(|| rect.right());

    PopupPosition::below(
        AnchorRect {
            right: rect.right(),
            bottom: rect.bottom(),
        },
        scroll_y,
        viewport_width,
    )
}

fn popup_style(visible: bool, position: Option<PopupPosition>) -> String {
    if !visible {
        return "display: none;".to_string();
    }
    match position {
        Some(position) => format!(
            "display: block; position: absolute; z-index: 1001; top: {}px; right: {}px;",
            position.top, position.right
        ),
        None => "display: block; position: absolute; z-index: 1001;".to_string(),
    }
}

fn mask_style(visible: bool) -> &'static str {
    if visible {
        "display: block; position: fixed; top: 0; right: 0; bottom: 0; left: 0; z-index: 1000;"
    } else {
        "display: none;"
    }
}

#[function_component(ExchangeWidget)]
pub fn exchange_widget(props: &WidgetProps) -> Html {
    let state = {
        let config = props.config.clone();
        use_mut_ref(move || WidgetState::new(&config))
    };
    let api = use_memo(props.config.api_base.clone(), |base| ExchangeApi::new(base.clone()));
    let rerender = use_force_update();
    let popup_ref = use_node_ref();

    let controller = Controller {
        state: state.clone(),
        api,
        rerender,
    };

    // Probe connectivity for the button icon
    {
        let controller = controller.clone();
        use_effect_with((), move |_| {
            controller.dispatch(Action::Initialized);
            || ()
        });
    }

    let on_button = {
        let controller = controller.clone();
        let anchor = props.anchor.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            controller.dispatch(Action::ButtonClicked(Some(popup_position(&anchor))));
        })
    };

    let on_mask = {
        let controller = controller.clone();
        let popup_ref = popup_ref.clone();
        Callback::from(move |e: MouseEvent| {
            let inside_popup = e
                .target()
                .and_then(|target| target.dyn_into::<Node>().ok())
                .zip(popup_ref.get())
                .map(|(target, popup)| popup.contains(Some(&target)))
                .unwrap_or(false);
            controller.dispatch(Action::MaskClicked { inside_popup });
        })
    };

    let on_edit = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| controller.dispatch(Action::EditClicked))
    };

    let on_toggle = {
        let controller = controller.clone();
        Callback::from(move |(folder_id, checked): (String, bool)| {
            controller.dispatch(Action::FolderToggled { folder_id, checked });
        })
    };

    let on_sync_now = {
        let controller = controller.clone();
        Callback::from(move |_: ()| controller.dispatch(Action::SyncNowClicked))
    };

    let on_input = {
        let controller = controller.clone();
        Callback::from(move |(field, value): (SettingsField, String)| {
            controller.dispatch(Action::FieldEdited(field, value));
        })
    };

    let on_save = {
        let controller = controller.clone();
        Callback::from(move |_: ()| controller.dispatch(Action::SaveClicked))
    };

    let on_cancel = {
        let controller = controller.clone();
        Callback::from(move |_: ()| controller.dispatch(Action::CancelClicked))
    };

    let view = state.borrow();
    let config = &props.config;

    let icon_src = match view.icon {
        ConnectionIcon::Connected => config.connected_icon.clone(),
        ConnectionIcon::Disconnected => config.disconnected_icon.clone(),
    };
    let icon_size = format!("{}px", config.icon_size);

    let panel = match view.panel {
        Panel::List => html! {
            <FolderList
                content={view.list.clone()}
                show_sync_now={view.shows_sync_now()}
                {on_toggle}
                {on_sync_now}
            />
        },
        Panel::Edit => html! {
            <SettingsPanel
                draft={view.draft.clone()}
                invalid={view.invalid_fields.clone()}
                rules={*view.rules()}
                notice={view.notice.clone()}
                saving={view.saving}
                {on_input}
                {on_save}
                {on_cancel}
            />
        },
    };

    let popup = html! {
        <div
            class="ExchangeSettingsWindow"
            ref={popup_ref}
            style={popup_style(view.popup_visible, view.position)}
        >
            <div class="ExchangeSettingsTitle">
                <h6>{ "Exchange Calendars" }</h6>
                <button
                    type="button"
                    class="btn btn-primary ExchangeEditSettingsButton"
                    disabled={view.edit_locked}
                    onclick={on_edit}
                >
                    { "Edit settings" }
                </button>
            </div>
            { panel }
        </div>
    };

    let mask = html! {
        <div class="ExchangeSettingsMask" style={mask_style(view.mask_visible)} onclick={on_mask} />
    };

    html! {
        <>
            <a href="#" class="ExchangeSettingsButton pull-right" title="Exchange Calendars" onclick={on_button}>
                <img src={icon_src} width={icon_size.clone()} height={icon_size} alt="Exchange" />
            </a>
            { yew::create_portal(popup, props.popup_host.clone()) }
            { yew::create_portal(mask, props.mask_host.clone()) }
        </>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_popup_has_no_offsets() {
        let position = PopupPosition {
            top: 120.0,
            right: 40.0,
        };
        assert_eq!(popup_style(false, Some(position)), "display: none;");
    }

    #[test]
    fn test_visible_popup_is_placed_under_anchor() {
        let style = popup_style(
            true,
            Some(PopupPosition {
                top: 120.0,
                right: 40.5,
            }),
        );
        assert!(style.starts_with("display: block;"));
        assert!(style.contains("top: 120px;"));
        assert!(style.contains("right: 40.5px;"));
    }

    #[test]
    fn test_mask_sits_below_popup() {
        assert!(mask_style(true).contains("z-index: 1000;"));
        assert!(popup_style(true, None).contains("z-index: 1001;"));
        assert_eq!(mask_style(false), "display: none;");
    }
}
