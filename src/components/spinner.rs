use yew::prelude::*;

#[function_component(LoadingOverlay)]
pub fn loading_overlay() -> Html {
    html! {
        <>
            <style>
                {r#"
                    #loadingSpinner {
                        position: fixed;
                        top: 0;
                        left: 0;
                        width: 100%;
                        height: 100%;
                        background: rgba(0, 0, 0, 0.8);
                        display: flex;
                        align-items: center;
                        justify-content: center;
                        z-index: 9999;
                        color: white;
                    }
                    .spinner-content {
                        display: flex;
                        flex-direction: column;
                        align-items: center;
                    }
                    .spinner {
                        border: 3px solid #f3f3f3;
                        border-top: 3px solid var(--primary-color);
                        border-radius: 50%;
                        width: 50px;
                        height: 50px;
                        animation: spin 1s linear infinite;
                        margin-bottom: 1rem;
                    }
                    @keyframes spin {
                        0% { transform: rotate(0deg); }
                        100% { transform: rotate(360deg); }
                    }
                "#}
            </style>
            <div class="spinner-content" role="progressbar" aria-label="Loading">
                <div class="spinner"></div>
                <p>{"Loading..."}</p>
            </div>
        </>
    }
}
