/// Maps a browser `KeyboardEvent.code` to the key name understood by the host's
/// input backend. `None` for keys the host does not support.
pub fn native_key(code: &str) -> Option<&'static str> {
    let key = match code {
        "KeyA" => "a",
        "KeyB" => "b",
        "KeyC" => "c",
        "KeyD" => "d",
        "KeyE" => "e",
        "KeyF" => "f",
        "KeyG" => "g",
        "KeyH" => "h",
        "KeyI" => "i",
        "KeyJ" => "j",
        "KeyK" => "k",
        "KeyL" => "l",
        "KeyM" => "m",
        "KeyN" => "n",
        "KeyO" => "o",
        "KeyP" => "p",
        "KeyQ" => "q",
        "KeyR" => "r",
        "KeyS" => "s",
        "KeyT" => "t",
        "KeyU" => "u",
        "KeyV" => "v",
        "KeyW" => "w",
        "KeyX" => "x",
        "KeyY" => "y",
        "KeyZ" => "z",

        "Digit0" => "0",
        "Digit1" => "1",
        "Digit2" => "2",
        "Digit3" => "3",
        "Digit4" => "4",
        "Digit5" => "5",
        "Digit6" => "6",
        "Digit7" => "7",
        "Digit8" => "8",
        "Digit9" => "9",

        "Numpad0" => "numpad_0",
        "Numpad1" => "numpad_1",
        "Numpad2" => "numpad_2",
        "Numpad3" => "numpad_3",
        "Numpad4" => "numpad_4",
        "Numpad5" => "numpad_5",
        "Numpad6" => "numpad_6",
        "Numpad7" => "numpad_7",
        "Numpad8" => "numpad_8",
        "Numpad9" => "numpad_9",
        "NumpadAdd" => "add",
        "NumpadSubtract" => "subtract",
        "NumpadMultiply" => "multiply",
        "NumpadDivide" => "divide",
        "NumpadDecimal" => "decimal",
        "NumpadEnter" => "enter",

        "F1" => "f1",
        "F2" => "f2",
        "F3" => "f3",
        "F4" => "f4",
        "F5" => "f5",
        "F6" => "f6",
        "F7" => "f7",
        "F8" => "f8",
        "F9" => "f9",
        "F10" => "f10",
        "F11" => "f11",
        "F12" => "f12",

        "ArrowUp" => "up",
        "ArrowDown" => "down",
        "ArrowLeft" => "left",
        "ArrowRight" => "right",
        "Home" => "home",
        "End" => "end",
        "PageUp" => "pageup",
        "PageDown" => "pagedown",
        "Insert" => "insert",
        "Delete" => "delete",

        "Backspace" => "backspace",
        "Enter" => "enter",
        "Tab" => "tab",
        "Space" => "space",
        "Escape" => "escape",

        "ShiftLeft" | "ShiftRight" => "shift",
        "ControlLeft" | "ControlRight" => "control",
        "AltLeft" | "AltRight" => "alt",
        "MetaLeft" | "MetaRight" => "command",
        "CapsLock" => "caps_lock",
        "NumLock" => "num_lock",
        "ScrollLock" => "scroll_lock",

        "Minus" => "-",
        "Equal" => "=",
        "BracketLeft" => "[",
        "BracketRight" => "]",
        "Backslash" => "\\",
        "Semicolon" => ";",
        "Quote" => "'",
        "Backquote" => "`",
        "Comma" => ",",
        "Period" => ".",
        "Slash" => "/",

        "PrintScreen" => "printscreen",
        "Pause" => "pause",

        _ => return None,
    };
    Some(key)
}
