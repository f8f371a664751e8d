use std::cell::RefCell;

use stylist::GlobalStyle;
use web_sys::{Element, MouseEvent};
use yew::prelude::*;

use crate::notification::Severity;

const NOTIFICATION_CSS: &str = r#"
    .notification {
        position: fixed;
        top: 20px;
        right: 20px;
        background: white;
        border-left: 4px solid var(--primary-color);
        padding: 1rem;
        border-radius: var(--radius);
        box-shadow: var(--shadow-lg);
        z-index: 1000;
        max-width: 400px;
        transform: translateX(100%);
        transition: transform 0.3s ease;
    }
    .notification-success { border-color: #10b981; }
    .notification-error { border-color: #ef4444; }
    .notification-info { border-color: #3b82f6; }
    .notification.show { transform: translateX(0); }
    .notification-content {
        display: flex;
        align-items: center;
        justify-content: space-between;
        gap: 1rem;
    }
    .notification-close {
        background: none;
        border: none;
        font-size: 1.5rem;
        cursor: pointer;
        color: var(--text-secondary);
    }
"#;

thread_local! {
    static STYLES: RefCell<Option<GlobalStyle>> = RefCell::new(None);
}

/// Registers the notification stylesheet the first time a panel is shown.
pub fn ensure_notification_styles() {
    STYLES.with(|styles| {
        let mut styles = styles.borrow_mut();
        if styles.is_some() {
            return;
        }
        match GlobalStyle::new(NOTIFICATION_CSS) {
            Ok(style) => *styles = Some(style),
            Err(e) => log::warn!("Failed to register notification styles: {}", e),
        }
    });
}

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub message: AttrValue,
    #[prop_or_default]
    pub severity: Severity,
    pub on_dismiss: Callback<()>,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let panel_ref = use_node_ref();

    let on_close = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };

    // Only clicks on the panel itself count, not on its content.
    let on_background = {
        let on_dismiss = props.on_dismiss.clone();
        let panel_ref = panel_ref.clone();
        Callback::from(move |e: MouseEvent| {
            let target = e.target_dyn_into::<Element>();
            if target.is_some() && target == panel_ref.cast::<Element>() {
                on_dismiss.emit(());
            }
        })
    };

    let severity_class = format!("notification-{}", props.severity.as_str());

    html! {
        <div
            ref={panel_ref}
            class={classes!("notification", severity_class)}
            role="status"
            onclick={on_background}
        >
            <div class="notification-content">
                <span class="notification-message">{ props.message.clone() }</span>
                <button class="notification-close" aria-label="Close" onclick={on_close}>
                    {"×"}
                </button>
            </div>
        </div>
    }
}
