use chordscout_common::StealthLevel;

use super::fingerprint::UserAgentProfile;

/// Construct Chrome command-line arguments for a given stealth level
/// and fingerprint.
pub fn build_stealth_arguments(level: StealthLevel, profile: &UserAgentProfile) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        "--disable-plugins-discovery".to_string(),
        format!("--user-agent={}", profile.user_agent),
        format!("--window-size={},{}", profile.viewport.0, profile.viewport.1),
        format!("--lang={}", profile.languages.join(",")),
    ];
    if level == StealthLevel::Maximum {
        args.push("--disable-features=IsolateOrigins,site-per-process".to_string());
    }
    args
}

/// JavaScript evasions applied after navigation to reduce automation signals.
pub struct StealthScripts;

impl StealthScripts {
    pub fn core_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            Object.defineProperty(navigator, 'plugins', { get: () => [1,2,3] });
            Object.defineProperty(navigator, 'languages', {
                get: () => ['en-US', 'en', 'ru']
            });
            if (!window.chrome) window.chrome = { runtime: {} };
        "#
    }

    pub fn webgl_evasions() -> &'static str {
        r#"
            const getParameter = WebGLRenderingContext.prototype.getParameter;
            WebGLRenderingContext.prototype.getParameter = function(parameter) {
                if (parameter === 37445) return 'Intel Inc.';
                if (parameter === 37446) return 'Intel Iris OpenGL Engine';
                return getParameter.call(this, parameter);
            };
        "#
    }

    pub fn canvas_evasions() -> &'static str {
        r#"
            const getContext = HTMLCanvasElement.prototype.getContext;
            HTMLCanvasElement.prototype.getContext = function(type,...args){
                const ctx = getContext.call(this,type,...args);
                if(type==='2d' && ctx) {
                    const origToDataURL=this.toDataURL;
                    this.toDataURL=function(...a){
                        const imgdata=ctx.getImageData(0,0,this.width,this.height);
                        for(let i=0;i<imgdata.data.length;i+=4){
                            if(Math.random()<0.001)imgdata.data[i]+=Math.random()<0.5?-1:1;
                        }
                        ctx.putImageData(imgdata,0,0);
                        return origToDataURL.call(this,...a);
                    };
                }
                return ctx;
            };
        "#
    }

    /// Scripts to run for `level`, in order.
    pub fn for_level(level: StealthLevel) -> Vec<&'static str> {
        match level {
            StealthLevel::Lightweight => vec![Self::core_evasions()],
            StealthLevel::Balanced => vec![Self::core_evasions(), Self::canvas_evasions()],
            StealthLevel::Maximum => vec![
                Self::core_evasions(),
                Self::canvas_evasions(),
                Self::webgl_evasions(),
            ],
        }
    }

    /// Override `navigator.platform` to match the session fingerprint.
    pub fn platform_override(profile: &UserAgentProfile) -> String {
        format!(
            "Object.defineProperty(navigator, 'platform', {{ get: () => '{}' }});",
            profile.platform.replace('\'', "")
        )
    }
}
