use std::collections::BTreeSet;

use exchange_shared::{SettingsField, ValidationRules};
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::state::SettingsDraft;

#[derive(Properties, PartialEq)]
pub struct SettingsPanelProps {
    pub draft: SettingsDraft,
    pub invalid: BTreeSet<SettingsField>,
    pub rules: ValidationRules,
    pub notice: Option<String>,
    pub saving: bool,
    pub on_input: Callback<(SettingsField, String)>,
    pub on_save: Callback<()>,
    pub on_cancel: Callback<()>,
}

struct FieldMeta {
    label: &'static str,
    placeholder: &'static str,
    input_type: &'static str,
}

fn field_meta(field: SettingsField, rules: &ValidationRules) -> FieldMeta {
    let requirement = if rules.is_required(field) {
        "Required"
    } else {
        "Optional"
    };

    match field {
        SettingsField::ServerName => FieldMeta {
            label: "URL",
            placeholder: "http://server/EWS/Exchange.asmx",
            input_type: "text",
        },
        SettingsField::DomainName => FieldMeta {
            label: "Domain",
            placeholder: "Exchange Domain Name",
            input_type: "text",
        },
        SettingsField::Username => FieldMeta {
            label: "Username",
            placeholder: requirement,
            input_type: "text",
        },
        SettingsField::Password => FieldMeta {
            label: "Password",
            placeholder: requirement,
            input_type: "password",
        },
    }
}

fn visible_fields(rules: &ValidationRules) -> impl Iterator<Item = SettingsField> + '_ {
    SettingsField::ALL
        .into_iter()
        .filter(move |field| *field != SettingsField::DomainName || rules.domain.is_visible())
}

#[function_component(SettingsPanel)]
pub fn settings_panel(props: &SettingsPanelProps) -> Html {
    let on_save = props.on_save.reform(|_: MouseEvent| ());
    let on_cancel = props.on_cancel.reform(|_: MouseEvent| ());

    let fields = visible_fields(&props.rules).map(|field| {
        let meta = field_meta(field, &props.rules);
        let invalid = props.invalid.contains(&field);

        let oninput = {
            let on_input = props.on_input.clone();
            Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                on_input.emit((field, input.value()));
            })
        };

        html! {
            <>
                <label
                    for={field.key()}
                    class={classes!(invalid.then_some("ExchangeFieldError"))}
                    style={if invalid { "color: red;" } else { "" }}
                >
                    { meta.label }
                </label>
                <input
                    type={meta.input_type}
                    id={field.key()}
                    name={field.key()}
                    placeholder={meta.placeholder}
                    value={props.draft.value(field).to_string()}
                    class={classes!(invalid.then_some("ExchangeFieldError"))}
                    style={if invalid { "border-color: red;" } else { "" }}
                    {oninput}
                />
                <br />
            </>
        }
    });

    html! {
        <div class="ExchangeEditSettingsPanel">
            <div class="ExchangeEditSettingsTitle"></div>
            if let Some(notice) = &props.notice {
                <div class="ExchangeSettingsError">{ notice }</div>
            }
            <div class="ExchangeEditSettingsContent">
                { for fields }
            </div>
            <div class="ExchangeEditSettingsButtons">
                <button
                    type="button"
                    class="btn btn-primary ExchangeEditSettingsSaveButton"
                    disabled={props.saving}
                    onclick={on_save}
                >
                    { "Save" }
                </button>
                <button type="button" class="btn ExchangeEditSettingsCancelButton" onclick={on_cancel}>
                    { "Cancel" }
                </button>
            </div>
        </div>
    }
}
