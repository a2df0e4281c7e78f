//! Category Selector
//!
//! One option list, three affordances: a dropdown, a pill row and a
//! bottom sheet for touch screens. Each marks the active option with its
//! own state attribute (`selected`, `aria-pressed`, `aria-current`).

use leptos::*;
use web_sys::TouchEvent;

use crate::state::{ClientMessage, GlobalState};

/// Dropdown selector
#[component]
pub fn CategorySelect() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let options = state.options;
    let active = state.active;

    let on_change = move |ev| {
        if let Ok(index) = event_target_value(&ev).parse::<usize>() {
            state.select(index);
        }
    };

    view! {
        <select class="category-select" aria-label="Category" on:change=on_change>
            <For
                each=move || options.get()
                key=|option| option.index
                children=move |option| {
                    let index = option.index;
                    view! {
                        <option value=index.to_string() selected=move || active.get() == index>
                            {option.label}
                        </option>
                    }
                }
            />
        </select>
    }
}

/// Row of pill buttons
#[component]
pub fn PillRow() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let options = state.options;
    let active = state.active;

    view! {
        <div class="category-pills" role="toolbar">
            <For
                each=move || options.get()
                key=|option| option.index
                children=move |option| {
                    let index = option.index;
                    let state = state.clone();
                    view! {
                        <button
                            class="pill"
                            title=format!("Category {}", option.number)
                            class:active=move || active.get() == index
                            aria-pressed=move || (active.get() == index).to_string()
                            on:click=move |_| state.select(index)
                        >
                            {option.label}
                        </button>
                    }
                }
            />
        </div>
    }
}

/// Bottom sheet list for touch screens.
///
/// Touches are forwarded to the host, which decides whether a tap is a
/// selection or the tail end of a scroll.
#[component]
pub fn BottomSheet() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let options = state.options;
    let active = state.active;
    let open = state.sheet_open;
    let scrolling = state.sheet_scrolling;

    // A selection (from any affordance) closes the sheet
    create_effect(move |_| {
        active.track();
        open.set(false);
    });

    let on_touch_start = {
        let state = state.clone();
        move |ev: TouchEvent| {
            if let Some(y) = first_touch_y(&ev) {
                state.send(ClientMessage::TouchStart { y });
            }
        }
    };
    let on_touch_move = {
        let state = state.clone();
        move |ev: TouchEvent| {
            if let Some(y) = first_touch_y(&ev) {
                state.send(ClientMessage::TouchMove { y });
            }
        }
    };
    let on_touch_end = {
        let state = state.clone();
        move |_: TouchEvent| state.send(ClientMessage::TouchEnd)
    };

    let label = {
        let state = state.clone();
        move || state.active_label().unwrap_or_else(|| "Categories".to_string())
    };

    view! {
        <div class="category-sheet">
            <button class="sheet-toggle" on:click=move |_| open.update(|o| *o = !*o)>
                {label}
            </button>

            <Show when=move || open.get()>
                <ul
                    class="sheet-list"
                    class:scrolling=move || scrolling.get()
                    on:touchstart=on_touch_start.clone()
                    on:touchmove=on_touch_move.clone()
                    on:touchend=on_touch_end.clone()
                >
                    <For
                        each=move || options.get()
                        key=|option| option.index
                        children={
                            let state = state.clone();
                            move |option| {
                                let index = option.index;
                                let state = state.clone();
                                view! {
                                    <li
                                        class="sheet-item"
                                        aria-current=move || (active.get() == index).to_string()
                                        on:click=move |_| state.send(ClientMessage::SheetTap { index })
                                    >
                                        {option.label}
                                    </li>
                                }
                            }
                        }
                    />
                </ul>
            </Show>
        </div>
    }
}

fn first_touch_y(ev: &TouchEvent) -> Option<f64> {
    ev.touches().get(0).map(|touch| touch.client_y() as f64)
}
